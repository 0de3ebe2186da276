//! Default world construction
//!
//! Builds the standard campaign map the game opens with: three
//! kingdoms holding five of six regions, two trade routes out of the
//! port, and one rival of each species lurking at the edges. Kingdom
//! temperaments are biased so the map produces wars (Morn), crusades
//! (Sareth), and safe harbors (Valdria) without scripting them.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::signals::SignalLog;
use crate::core::types::{CompetitorType, GeographyType, KingdomRelation, RegionId};
use crate::world::competitor::Competitor;
use crate::world::kingdom::Kingdom;
use crate::world::region::Region;
use crate::world::simulation::WorldSimulation;

fn assign_region(region: &mut Region, kingdom: &mut Kingdom, signals: &mut SignalLog) {
    region.set_owning_kingdom(Some(kingdom.id.clone()), signals);
    kingdom.add_region(region.id.clone());
}

/// The default campaign map at the starting year.
pub fn standard_world(rng: &mut ChaCha8Rng) -> WorldSimulation {
    let mut world = WorldSimulation::new();

    let mut goldport = Region::new("region-goldport", "Goldport", GeographyType::Coastal);
    let mut midlands = Region::new("region-midlands", "The Midlands", GeographyType::Inland);
    let mut ironpeaks = Region::new("region-ironpeaks", "Iron Peaks", GeographyType::Mountain);
    let mut thornwood = Region::new("region-thornwood", "Thornwood", GeographyType::Forest);
    let mut sunward = Region::new("region-sunward", "Sunward Wastes", GeographyType::Desert);
    let mirefen = Region::new("region-mirefen", "Mirefen", GeographyType::Swamp);

    goldport.add_trade_route(RegionId::from("region-midlands"));
    midlands.add_trade_route(RegionId::from("region-goldport"));
    goldport.add_trade_route(RegionId::from("region-ironpeaks"));
    ironpeaks.add_trade_route(RegionId::from("region-goldport"));

    let mut valdria = Kingdom::new("kingdom-valdria", "Valdria", "Queen Maren III");
    valdria.set_prosperity(rng.gen_range(55..=70));
    valdria.set_tolerance(rng.gen_range(55..=70));

    let mut morn = Kingdom::new("kingdom-morn", "Morn", "King Aldric the Stern");
    morn.set_military(rng.gen_range(60..=75));
    morn.set_stability(rng.gen_range(40..=55));

    let mut sareth = Kingdom::new("kingdom-sareth", "Sareth", "Hierarch Ozren");
    sareth.set_tolerance(rng.gen_range(20..=35));
    sareth.set_culture(rng.gen_range(60..=80));

    valdria.set_relation(morn.id.clone(), KingdomRelation::Rivalry);
    morn.set_relation(valdria.id.clone(), KingdomRelation::Rivalry);

    // Construction-time ownership changes are not news; drop the signals.
    let mut signals = SignalLog::new();
    assign_region(&mut goldport, &mut valdria, &mut signals);
    assign_region(&mut midlands, &mut valdria, &mut signals);
    assign_region(&mut ironpeaks, &mut morn, &mut signals);
    assign_region(&mut thornwood, &mut morn, &mut signals);
    assign_region(&mut sunward, &mut sareth, &mut signals);

    for region in [goldport, midlands, ironpeaks, thornwood, sunward, mirefen] {
        world.add_region(region);
    }
    for kingdom in [valdria, morn, sareth] {
        world.add_kingdom(kingdom);
    }

    let species = [
        ("competitor-vyrmisk", "Vyrmisk the Gilded", CompetitorType::Dragon),
        ("competitor-morvane", "Countess Morvane", CompetitorType::Vampire),
        ("competitor-szorath", "Szorath the Unraveled", CompetitorType::Lich),
        ("competitor-liriel", "Liriel of the Hollow Court", CompetitorType::Fae),
        ("competitor-malgrim", "Malgrim", CompetitorType::Demon),
    ];
    for (id, name, competitor_type) in species {
        let mut rival = Competitor::new(id, name, competitor_type);
        rival.set_power_level(rng.gen_range(40..=60));
        rival.set_aggression(rng.gen_range(30..=70));
        rival.set_greed(rng.gen_range(30..=70));
        rival.set_cunning(rng.gen_range(30..=70));
        world.add_competitor(rival);
    }
    // The dragon hoards in the mountains; the fae court keeps the swamp.
    world.competitors_mut()[0].add_territory(RegionId::from("region-ironpeaks"));
    world.competitors_mut()[3].add_territory(RegionId::from("region-mirefen"));

    world
}

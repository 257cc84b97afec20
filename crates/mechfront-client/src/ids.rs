//! Record id minting: `<prefix>_<millis>_<random hex>`.

use rand::Rng;

use mechfront_logic::common::{MechId, PilotId, Timestamp};

fn mint(prefix: &str, now: Timestamp) -> String {
    let suffix: u32 = rand::thread_rng().gen();
    format!("{}_{}_{:08x}", prefix, now.millis(), suffix)
}

pub fn pilot_id(now: Timestamp) -> PilotId {
    PilotId(mint("pilot", now))
}

pub fn mech_id(now: Timestamp) -> MechId {
    MechId(mint("mech", now))
}

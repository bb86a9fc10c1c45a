pub mod bamboohr;
pub mod qualification;
pub mod roster;

#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod cfg;
mod constants;
mod ephemeris;
mod error;
mod navfilter;
mod range;
mod store;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::cfg::{Config, FilterConfig, StoreConfig};
    pub use crate::ephemeris::{ClockModel, GlonassState, Kepler, OrbElem, OrbitModel, Xvt};
    pub use crate::error::Error;
    pub use crate::navfilter::{
        CNavEmptyFilter, CNavParityFilter, CNavTowFilter, CrossSourceFilter, EmptyFilter,
        EphMaker, NavFilter, NavFilterKey, NavFilterMgr, NavMsgList, ParityFilter, TlmHowFilter,
    };
    pub use crate::range::EphemerisRange;
    pub use crate::store::OrbElemStore;
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::Vector3;
}

// pub export
pub use constants::{KEPLER_TOLERANCE_RAD, MAX_KEPLER_ITER, SPEED_OF_LIGHT_M_S};
pub use error::Error;
pub use navfilter::{cnav, lnav};

#![allow(unused)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
pub(crate) mod utils;

pub mod asn;
pub mod channel_hopping;
pub mod config;
pub mod error;
pub mod frame_codec;
pub mod lock;
pub mod neighbor;
pub mod engine;
pub mod queue;
pub mod radio;
pub mod radio_gate;
pub mod ring;
pub mod schedule;
pub mod security;
pub mod sync;
pub mod timesync;
pub mod time;
pub mod timer;
pub mod upper;

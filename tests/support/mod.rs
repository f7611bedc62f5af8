#![allow(dead_code)]

pub mod brainscan_env;
pub mod http;

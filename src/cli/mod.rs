//! CLI module for the imgly-pixelcut library
//!
//! This module is only available when the "cli" feature is enabled.

mod config;
#[path = "main.rs"]
mod main_impl;

pub use main_impl::{
    main, run, Cli, CliFilter, CliFlip, CliFormat, Command, CompressArgs, EncoderArgs, FitArgs,
    GrabCutArgs, IoArgs, KeyArgs, LogFormat, MaskMode, TransformArgs, TransformOp, WandArgs,
};

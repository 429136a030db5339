//! Flag parsing shared by the binaries. Flags take `--name=value` or
//! `--name value`.

use std::path::PathBuf;
use std::str::FromStr;

use crate::config::RatingConfig;

pub fn args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

/// `RatingConfig::from_env`, then `--passes`, `--offset`, `--slope` and `--step`.
pub fn config_from_args(args: &[String]) -> RatingConfig {
    let mut config = RatingConfig::from_env();
    if let Some(passes) = parse_arg(args, "--passes") {
        config.passes = passes;
    }
    if let Some(offset) = parse_arg(args, "--offset") {
        config.sigmoid_offset = offset;
    }
    if let Some(slope) = parse_arg(args, "--slope") {
        config.sigmoid_slope = slope;
    }
    if let Some(step) = parse_arg(args, "--step") {
        config.step = step;
    }
    config
}

pub fn parse_path_arg(args: &[String], name: &str) -> Option<PathBuf> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&format!("{name}=")) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next.trim()));
        }
    }
    None
}

pub fn parse_arg<T: FromStr>(args: &[String], name: &str) -> Option<T> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}="))
            && let Ok(v) = raw.trim().parse::<T>()
        {
            return Some(v);
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && let Ok(v) = next.trim().parse::<T>()
        {
            return Some(v);
        }
    }
    None
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}

use std::collections::HashMap;
use std::env;
use std::fmt::Write;
use std::path::PathBuf;

fn main() {
    // (Variable, Type, Default value)
    let mut configs: HashMap<&str, (&str, &str)> = HashMap::from([
        ("RADIO_ON_DURING_TIMESLOT", ("bool", "false")),
        ("CCA_ENABLED", ("bool", "true")),
        ("LLSEC_ENABLED", ("bool", "false")),
        ("HW_FRAME_FILTERING", ("bool", "true")),
        ("RESYNC_WITH_SFD_TIMESTAMPS", ("bool", "true")),
        ("TIMESYNC_REMOVE_JITTER", ("bool", "true")),
        ("MAX_FRAME_RETRIES", ("u8", "3")),
        // Open question, resolved: kept enabled by default. See DESIGN.md.
        ("DRIFT_FROM_ACK_ENABLED", ("bool", "true")),
        // Open question, resolved: left disabled, experimental. See DESIGN.md.
        ("GUARD_BEACON", ("bool", "false")),
        ("GUARD_BEACON_TIME_US", ("i64", "2_000")),
    ]);

    println!("cargo:rerun-if-changed=build.rs");
    for name in configs.keys() {
        println!("cargo:rerun-if-env-changed=DOT15D4_TSCH_{name}");
    }

    let mut data = String::new();
    writeln!(data, "use crate::time::Duration;").unwrap();

    for (var, value) in std::env::vars() {
        if let Some(name) = var.strip_prefix("DOT15D4_TSCH_") {
            let Some((_, (ty, _))) = configs.remove_entry(name) else {
                panic!("Wrong configuration name {name}");
            };
            writeln!(data, "pub const {name}: {ty} = {value};").unwrap();
        }
    }

    for (name, (ty, value)) in configs.iter() {
        writeln!(data, "pub const {name}: {ty} = {value};").unwrap();
    }

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    let out_file = out_dir.join("config.rs");
    std::fs::write(out_file, data).unwrap();
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use flexgeom_pipeline::{derive_geometries, BuildOptions, Dialect, ProfileRegistry};

/// Derive cone-beam acquisition geometry from a scanner settings file.
#[derive(Debug, Parser)]
#[command(author, version, about = "FleX-ray geometry derivation")]
struct Args {
    /// Path to the settings file.
    #[arg(required_unless_present = "list_profiles")]
    settings: Option<PathBuf>,

    /// Settings-file dialect.
    #[arg(long, value_enum, default_value_t = DialectArg::Data)]
    dialect: DialectArg,

    /// Calibration profile name (see --list-profiles). No correction if omitted.
    #[arg(long)]
    profile: Option<String>,

    /// Keep the trailing angle of the start..=last sweep instead of dropping
    /// the 0/360 degree duplicate.
    #[arg(long)]
    include_last: bool,

    /// List the registered calibration profiles and exit.
    #[arg(long)]
    list_profiles: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DialectArg {
    /// Legacy "data settings XRE.txt" format.
    Data,
    /// Newer "scan settings.txt" format.
    Scan,
}

impl DialectArg {
    fn to_dialect(self) -> Dialect {
        match self {
            DialectArg::Data => Dialect::data_settings(),
            DialectArg::Scan => Dialect::scan_settings(),
        }
    }
}

fn run(args: &Args) -> Result<String> {
    let registry = ProfileRegistry::cwi_flexray();

    if args.list_profiles {
        let mut out = String::new();
        for name in registry.names() {
            out.push_str(name);
            out.push('\n');
        }
        return Ok(out);
    }

    let settings = args
        .settings
        .as_deref()
        .context("a settings file is required")?;
    let options = BuildOptions {
        skip_last: !args.include_last,
    };
    let bundle = derive_geometries(
        settings,
        &args.dialect.to_dialect(),
        args.profile.as_deref(),
        &registry,
        &options,
    )
    .with_context(|| format!("deriving geometry from {}", settings.display()))?;

    Ok(serde_json::to_string_pretty(&bundle)?)
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    println!("{}", run(&args)?);
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_settings() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SOD=\"500.0\"").unwrap();
        writeln!(file, "SDD=\"1000.0\"").unwrap();
        writeln!(file, "ver_tube=0.0").unwrap();
        writeln!(file, "tra_tube=0.0").unwrap();
        writeln!(file, "ver_det=0.0").unwrap();
        writeln!(file, "tra_det=0.0").unwrap();
        writeln!(file, "tra_obj=0.0").unwrap();
        writeln!(file, "Start angle=0.0").unwrap();
        writeln!(file, "Last angle=360.0").unwrap();
        writeln!(file, "Voxel size=0.1").unwrap();
        writeln!(file, "Binned pixelsize (mm)=0.1").unwrap();
        writeln!(file, "total projections=9").unwrap();
        writeln!(file, "Binning value=2").unwrap();
        writeln!(file, "ROI=100;100;1700;1600").unwrap();
        file
    }

    fn args_for(file: &tempfile::NamedTempFile) -> Args {
        Args {
            settings: Some(file.path().to_path_buf()),
            dialect: DialectArg::Data,
            profile: None,
            include_last: false,
            list_profiles: false,
        }
    }

    #[test]
    fn prints_geometry_bundle_json() {
        let file = sample_settings();
        let json = run(&args_for(&file)).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["projection"]["det_shape"]["rows"], 750);
        assert_eq!(v["volume"]["frames"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn include_last_keeps_all_angles() {
        let file = sample_settings();
        let mut args = args_for(&file);
        args.include_last = true;
        let json = run(&args).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["volume"]["frames"].as_array().unwrap().len(), 9);
    }

    #[test]
    fn list_profiles_works_without_a_settings_file() {
        let args = Args::try_parse_from(["flexgeom", "--list-profiles"]).unwrap();
        assert!(args.settings.is_none());
        let out = run(&args).unwrap();
        assert!(out.contains("cwi-flexray-2022-10-28"));
    }

    #[test]
    fn settings_path_is_required_otherwise() {
        assert!(Args::try_parse_from(["flexgeom"]).is_err());
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let file = sample_settings();
        let mut args = args_for(&file);
        args.profile = Some("bogus".into());
        assert!(run(&args).is_err());
    }
}

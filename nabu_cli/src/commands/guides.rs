//! `nabu guides`: incremental RST guide builds

use clap::Args;
use nabu_guides::Builder;
use nabu_reflection::config::runtime::RuntimeConfig;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct GuidesArgs {
    /// Directory holding the guide sources
    pub source: PathBuf,

    /// Metadata file kept between builds
    #[arg(long, default_value = ".nabu/meta.json")]
    pub meta: PathBuf,

    /// Write rendered pages below this directory
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Runtime preferences file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Source file extension, overriding the preferences
    #[arg(long)]
    pub extension: Option<String>,

    /// Role for interpreted text written without one
    #[arg(long)]
    pub default_role: Option<String>,

    /// Fail the build when invalid links remain
    #[arg(long)]
    pub fail_on_invalid_links: bool,
}

impl GuidesArgs {
    fn builder(&self) -> Result<Builder, Box<dyn std::error::Error>> {
        let config = match &self.config {
            Some(path) => RuntimeConfig::from_toml_file(path)?,
            None => RuntimeConfig::default(),
        };

        let mut builder = Builder::from_preferences(&config.guides);
        if let Some(extension) = &self.extension {
            builder = builder.with_extension(extension);
        }
        if let Some(role) = &self.default_role {
            builder = builder.with_default_role(role);
        }
        if self.fail_on_invalid_links {
            builder = builder.fail_on_invalid_links(true);
        }
        Ok(builder)
    }
}

pub fn run(args: &GuidesArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let builder = args.builder()?;
    log::info!("building guides in {}", args.source.display());

    match builder.build(&args.source, &args.meta, args.out.as_deref()) {
        Ok(report) => {
            eprintln!("{}", report.summary());
            Ok(!report.has_failures())
        }
        Err(error) => {
            eprintln!("error[{}]: {}", error.error_code().as_str(), error);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        args: GuidesArgs,
    }

    fn parse(argv: &[&str]) -> GuidesArgs {
        Harness::try_parse_from(std::iter::once("guides").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["docs"]);
        assert_eq!(args.meta, PathBuf::from(".nabu/meta.json"));
        assert!(args.out.is_none());
        assert!(!args.fail_on_invalid_links);
    }

    #[test]
    fn test_build_writes_pages_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("index.txt"), "Welcome\n=======\n\nSee :doc:`usage`.\n").unwrap();
        fs::write(docs.join("usage.txt"), "Usage\n=====\n\nRun it.\n").unwrap();

        let meta = dir.path().join("meta.json");
        let out = dir.path().join("out");
        let args = parse(&[
            docs.to_str().unwrap(),
            "--meta",
            meta.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--extension",
            "txt",
        ]);

        assert!(run(&args).unwrap());
        assert!(meta.is_file());
        let index = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(index.contains("href=\"usage.html\""));
    }

    #[test]
    fn test_missing_source_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let args = parse(&[
            dir.path().join("missing").to_str().unwrap(),
            "--meta",
            dir.path().join("meta.json").to_str().unwrap(),
        ]);
        assert!(!run(&args).unwrap());
    }
}

//! `pxedit init`: writes a `pxedit.yaml` holding every setting at its
//! default value, so users have something to edit.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::{EditorConfig, CONFIG_FILENAME};
use crate::error::{EditError, Result};
use crate::output::{display_path, Printer};

/// Write a default pxedit.yaml
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Target directory
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Replace a pxedit.yaml that is already there
    #[arg(long, short = 'f')]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let target = args.dir.join(CONFIG_FILENAME);

    match (target.is_file(), args.force) {
        (true, false) => return Err(refuse(target)),
        (true, true) => printer.warning("Overwriting", &display_path(&target)),
        _ => {}
    }

    write_defaults(&target)?;
    printer.success("Created", &display_path(&target));
    Ok(())
}

fn refuse(target: PathBuf) -> EditError {
    EditError::Validation {
        message: format!("{} is already present", display_path(&target)),
        path: target,
        help: Some("Pass --force to replace it with the defaults".to_string()),
    }
}

fn write_defaults(target: &Path) -> Result<()> {
    let yaml = EditorConfig::default().to_yaml()?;
    std::fs::write(target, yaml).map_err(|source| EditError::Io {
        path: target.to_path_buf(),
        message: format!("could not write defaults: {source}"),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn init_in(dir: &Path, force: bool) -> Result<()> {
        let args = InitArgs {
            dir: dir.to_path_buf(),
            force,
        };
        run(args, &Printer::new())
    }

    #[test]
    fn writes_config_that_loads_back_as_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        init_in(tmp.path(), false).unwrap();

        let loaded = EditorConfig::load(&tmp.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(loaded, EditorConfig::default());
    }

    #[test]
    fn existing_file_is_left_alone_without_force() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join(CONFIG_FILENAME);
        fs::write(&target, "seed: 1\n").unwrap();

        let err = init_in(tmp.path(), false).unwrap_err();
        assert!(matches!(err, EditError::Validation { .. }));
        assert_eq!(fs::read_to_string(&target).unwrap(), "seed: 1\n");
    }

    #[test]
    fn force_replaces_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join(CONFIG_FILENAME);
        fs::write(&target, "seed: 1\n").unwrap();

        init_in(tmp.path(), true).unwrap();
        assert_eq!(
            EditorConfig::load(&target).unwrap(),
            EditorConfig::default()
        );
    }
}

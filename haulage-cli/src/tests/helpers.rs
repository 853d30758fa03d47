//! Temporary workspaces and in-process command invocation.

use super::*;
use camino::Utf8PathBuf;
use haulage_core::test_support::sample_seed;
use serde::de::DeserializeOwned;
use std::fs;
use tempfile::TempDir;

/// Database and network file inside a throwaway directory.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.root.join("state").join("haulage.db")
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Write the three-facility sample network and return its path.
    pub(super) fn write_sample_network(&self) -> Utf8PathBuf {
        let path = self.path("network.json");
        let payload = serde_json::to_string_pretty(&sample_seed()).expect("serialise seed");
        write_utf8(&path, payload.as_bytes());
        path
    }

    /// Run `haulage <command> <args..> --database <db>` and capture stdout.
    pub(super) fn run(&self, command: &str, args: &[&str]) -> (Result<(), CliError>, Vec<u8>) {
        let database = self.database();
        let mut argv = vec!["haulage", command];
        argv.extend_from_slice(args);
        argv.extend(["--database", database.as_str()]);
        let mut stdout = Vec::new();
        let result = Cli::try_parse_from(argv)
            .map_err(CliError::from)
            .and_then(|cli| dispatch(cli.command, &mut stdout));
        (result, stdout)
    }

    /// Run a command that must succeed and decode its JSON output.
    pub(super) fn run_json<T: DeserializeOwned>(&self, command: &str, args: &[&str]) -> T {
        let (result, stdout) = self.run(command, args);
        if let Err(err) = result {
            panic!("{command} failed: {err}");
        }
        serde_json::from_slice(&stdout).expect("command output should be JSON")
    }

    pub(super) fn import_sample_network(&self) {
        let network = self.write_sample_network();
        let (result, _) = self.run(CMD_IMPORT, &["--network", network.as_str()]);
        result.expect("sample network imports");
    }
}

pub(super) fn write_utf8(path: &Utf8PathBuf, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write fixture file");
}

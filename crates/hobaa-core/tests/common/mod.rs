// Shared fakes and fixtures for hobaa-core integration tests.
#![allow(clippy::unwrap_used, dead_code)]

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hobaa_api::HobaaClient;
use hobaa_core::{
    CoreError, IconProvisioner, IdentityResolver, Layout, OsIntegration, ResourceEditor,
    ResourceProvider, Site, SiteAddress,
};
use url::Url;

/// Smallest byte string the provisioner accepts as an ICO.
pub const TINY_ICO: [u8; 6] = [0, 0, 1, 0, 0, 0];
pub const FALLBACK: &str = "https://www.google.com";

// ── Resources ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeResources {
    pub catalog: HashMap<String, Vec<u8>>,
    pub seeds: Vec<Site>,
}

impl ResourceProvider for FakeResources {
    fn default_icon(&self) -> Result<Vec<u8>, CoreError> {
        Ok(TINY_ICO.to_vec())
    }

    fn catalog_icon(&self, file: &str) -> Option<Vec<u8>> {
        self.catalog.get(file).cloned()
    }

    fn catalog_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.catalog.keys().cloned().collect();
        files.sort();
        files
    }

    fn seed_sites(&self) -> Vec<Site> {
        self.seeds.clone()
    }
}

// ── OS ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeOs {
    pub spawned: Mutex<Vec<(PathBuf, Vec<String>)>>,
    pub alive: Mutex<HashSet<u32>>,
    pub cache_refreshes: Mutex<u32>,
    pub fail_spawn: bool,
}

impl FakeOs {
    pub fn spawned(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.spawned.lock().unwrap().clone()
    }

    pub fn refreshes(&self) -> u32 {
        *self.cache_refreshes.lock().unwrap()
    }
}

impl OsIntegration for FakeOs {
    fn spawn_detached(&self, program: &Path, args: &[OsString]) -> Result<u32, CoreError> {
        if self.fail_spawn {
            return Err(CoreError::Spawn {
                program: program.to_owned(),
                source: std::io::Error::other("spawn disabled"),
            });
        }
        let args = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let mut spawned = self.spawned.lock().unwrap();
        spawned.push((program.to_owned(), args));
        Ok(9000 + u32::try_from(spawned.len()).unwrap())
    }

    fn is_process_alive(&self, pid: u32) -> bool {
        self.alive.lock().unwrap().contains(&pid)
    }

    fn refresh_icon_cache(&self) {
        *self.cache_refreshes.lock().unwrap() += 1;
    }

    fn current_pid(&self) -> u32 {
        4242
    }
}

// ── Resource editor ─────────────────────────────────────────────────

pub struct FakeEditor {
    pub available: bool,
    pub fail: bool,
}

impl ResourceEditor for FakeEditor {
    fn is_available(&self) -> bool {
        self.available
    }

    fn set_icon(&self, executable: &Path, icon: &Path) -> Result<(), CoreError> {
        if self.fail {
            std::fs::write(executable, b"garbage")?;
            return Err(CoreError::ResourceEditor {
                executable: executable.to_owned(),
                message: "rcedit exited with status 1".into(),
            });
        }
        let mut bytes = std::fs::read(executable)?;
        bytes.extend_from_slice(b"+icon:");
        bytes.extend_from_slice(icon.to_string_lossy().as_bytes());
        std::fs::write(executable, bytes)?;
        Ok(())
    }
}

// ── Fixture ─────────────────────────────────────────────────────────

pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub layout: Layout,
    pub resources: Arc<FakeResources>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_resources(FakeResources::default())
    }

    pub fn with_resources(resources: FakeResources) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("AppData").join("Hobaa");
        let exe_dir = dir.path().join("bin");
        std::fs::create_dir_all(root.join("icons")).unwrap();
        std::fs::create_dir_all(&exe_dir).unwrap();
        Self {
            layout: Layout::new(root, exe_dir),
            dir,
            resources: Arc::new(resources),
        }
    }

    pub fn provisioner(&self, client: HobaaClient, remote_catalog: Option<Url>) -> IconProvisioner {
        IconProvisioner::new(
            self.layout.icons_dir(),
            self.resources.clone(),
            client,
            remote_catalog,
        )
    }

    pub fn resolver(&self, client: HobaaClient, remote_sites: Option<Url>) -> IdentityResolver {
        let provisioner = self.provisioner(client.clone(), None);
        self.resolver_with(client, remote_sites, provisioner)
    }

    pub fn resolver_with(
        &self,
        client: HobaaClient,
        remote_sites: Option<Url>,
        provisioner: IconProvisioner,
    ) -> IdentityResolver {
        IdentityResolver::new(
            self.layout.sites_path(),
            self.layout.working_sites_path(),
            SiteAddress::parse(FALLBACK).unwrap(),
            remote_sites,
            client,
            provisioner,
        )
    }

    pub fn write_working_sites(&self, sites: &[Site]) {
        std::fs::write(
            self.layout.working_sites_path(),
            serde_json::to_vec(sites).unwrap(),
        )
        .unwrap();
    }

    pub fn write_icon(&self, name: &str) {
        std::fs::write(self.layout.icon_path(name), TINY_ICO).unwrap();
    }
}

/// Client with a short timeout for tests that talk to wiremock.
pub fn client() -> HobaaClient {
    HobaaClient::with_client(
        reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap(),
    )
}

/// Client whose DNS sends `host` to a loopback address nothing listens on,
/// so every request to it fails fast without leaving the machine.
pub fn client_unreachable(host: &str) -> HobaaClient {
    let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();
    HobaaClient::with_client(
        reqwest::Client::builder()
            .resolve(host, addr)
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap(),
    )
}

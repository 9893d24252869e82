use std::{
    env, fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;
use wedsite::config::{ConfigLoader, TenantLookupMode};

const VARS: &[&str] = &[
    "WEDSITE_PROFILE",
    "WEDSITE_API_BIND_ADDR",
    "WEDSITE_LOG_LEVEL",
    "WEDSITE_ROOT_DOMAIN",
    "WEDSITE_SESSION_SECRET",
    "WEDSITE_INTERNAL_API_SECRET",
    "WEDSITE_TENANT_LOOKUP_MODE",
    "WEDSITE_IMPORT_MAX_BYTES",
];

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    for var in VARS {
        unsafe {
            env::remove_var(var);
        }
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::write(path, contents).unwrap();
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.tenant_lookup_mode, TenantLookupMode::Database);
    assert_eq!(cfg.import_max_bytes, 5 * 1024 * 1024);
    cfg.bind_addr().expect("default bind addr parses");
    clear_env();
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "WEDSITE_API_BIND_ADDR=127.0.0.1:3000\n");
    write_env_file(
        &temp_dir,
        ".env.test",
        "WEDSITE_API_BIND_ADDR=192.168.0.10:5000\nWEDSITE_ROOT_DOMAIN=Example.COM.\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "WEDSITE_API_BIND_ADDR=10.0.0.5:6000\n",
    );

    // Select profile via .env.local before profile-specific files load.
    write_env_file(
        &temp_dir,
        ".env.local",
        "WEDSITE_PROFILE=test\nWEDSITE_API_BIND_ADDR=127.0.0.1:4000\n",
    );

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with layered env files");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
    assert_eq!(cfg.root_domain, "example.com");
    clear_env();
}

#[test]
fn os_environment_has_highest_precedence() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "WEDSITE_API_BIND_ADDR=127.0.0.1:3000\nWEDSITE_IMPORT_MAX_BYTES=1024\n",
    );

    unsafe {
        env::set_var("WEDSITE_API_BIND_ADDR", "0.0.0.0:9090");
    }

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with env override");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:9090");
    assert_eq!(cfg.import_max_bytes, 1024);

    clear_env();
}

#[test]
fn invalid_bind_addr_returns_error() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("WEDSITE_API_BIND_ADDR", "not-an-addr");
    }
    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let err = loader.load().expect_err("invalid bind addr should fail");
    assert!(format!("{}", err).contains("invalid api bind address"));

    clear_env();
}

#[test]
fn production_profile_requires_secrets() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    unsafe {
        env::set_var("WEDSITE_PROFILE", "production");
        env::set_var("WEDSITE_ROOT_DOMAIN", "wedsite.app");
    }
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let err = loader.load().expect_err("missing session secret should fail");
    assert!(format!("{}", err).contains("session secret is missing"));

    unsafe {
        env::set_var("WEDSITE_SESSION_SECRET", "too-short");
    }
    let err = loader.load().expect_err("short session secret should fail");
    assert!(format!("{}", err).contains("at least 32 bytes"));

    unsafe {
        env::set_var(
            "WEDSITE_SESSION_SECRET",
            "0123456789abcdef0123456789abcdef",
        );
    }
    let err = loader.load().expect_err("missing internal secret should fail");
    assert!(format!("{}", err).contains("internal API secret"));

    unsafe {
        env::set_var("WEDSITE_INTERNAL_API_SECRET", "internal-shared-secret");
    }
    let cfg = loader.load().expect("production config with secrets loads");
    assert_eq!(cfg.profile, "production");
    assert_eq!(cfg.root_domain, "wedsite.app");

    clear_env();
}

#[test]
fn unknown_tenant_lookup_mode_is_rejected() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("WEDSITE_TENANT_LOOKUP_MODE", "carrier-pigeon");
    }
    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let err = loader.load().expect_err("unknown mode should fail");
    assert!(format!("{}", err).contains("invalid tenant lookup mode"));

    clear_env();
}

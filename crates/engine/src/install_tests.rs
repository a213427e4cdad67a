// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::testing::{settings, uploaded, with_site_packages};
use bx_adapters::{FakeProcessAdapter, ProcessOutput};
use tempfile::TempDir;
use yare::parameterized;

fn manifest() -> PackageManifest {
    PackageManifest::new()
        .with(PackageKind::AnsibleGalaxy, ["geerlingguy.java"])
        .with(PackageKind::Pip, ["requests", "pyyaml"])
}

struct Fixture {
    _deploy: TempDir,
    ws: Workspace,
    fake: FakeProcessAdapter,
    installer: Installer<FakeProcessAdapter>,
}

fn fixture(edit: impl FnOnce(&mut Settings)) -> Fixture {
    let deploy = TempDir::new().unwrap();
    let ws = uploaded(deploy.path());
    with_site_packages(&ws);
    let fake = FakeProcessAdapter::new();
    let mut settings = settings(deploy.path());
    edit(&mut settings);
    let installer = Installer::new(fake.clone(), &settings);
    Fixture {
        _deploy: deploy,
        ws,
        fake,
        installer,
    }
}

#[tokio::test]
async fn installs_utility_then_pip_then_galaxy() {
    let f = fixture(|_| {});
    let ws_path = f.ws.path().display().to_string();

    let transcript = f
        .installer
        .install(&f.ws, &manifest(), &mut Vec::new())
        .await
        .unwrap();

    assert_eq!(
        f.fake.command_lines(),
        vec![
            format!("cp -r /opt/bx_utils {}/lib/python3.11/site-packages/", ws_path),
            format!("{}/bin/pip install requests", ws_path),
            format!("{}/bin/pip install pyyaml", ws_path),
            format!(
                "ansible-galaxy install geerlingguy.java -p {}/Scripts/ansible/roles",
                ws_path
            ),
        ]
    );
    assert_eq!(
        transcript,
        "Installed pip packages:\n   requests\n   pyyaml\n\
         Installed ansible_galaxy packages:\n   geerlingguy.java\n"
    );
    assert_eq!(f.ws.read_marker().unwrap(), Some(transcript));
}

#[tokio::test]
async fn empty_manifest_still_installs_utility_and_writes_marker() {
    let f = fixture(|_| {});

    let transcript = f
        .installer
        .install(&f.ws, &PackageManifest::new(), &mut Vec::new())
        .await
        .unwrap();

    assert_eq!(transcript, "");
    assert_eq!(f.fake.calls().len(), 1);
    assert!(f.ws.has_marker());
}

#[tokio::test]
async fn requirements_txt_installs_from_environments_dir() {
    let f = fixture(|s| s.pip_install_user = true);
    let ws_path = f.ws.path().display().to_string();
    let manifest = PackageManifest::new().with(PackageKind::Pip, [REQUIREMENTS_TXT]);

    f.installer.install(&f.ws, &manifest, &mut Vec::new()).await.unwrap();

    assert_eq!(
        f.fake.command_lines()[1],
        format!(
            "{}/bin/pip install --user -r {}/Environments/requirements.txt",
            ws_path, ws_path
        )
    );
}

#[tokio::test]
async fn proxies_are_forwarded() {
    let f = fixture(|s| {
        s.http_proxy = Some("http://plain:3128".to_string());
        s.https_proxy = Some("http://secure:3129".to_string());
    });

    f.installer.install(&f.ws, &manifest(), &mut Vec::new()).await.unwrap();

    let calls = f.fake.calls();
    let pip = calls.iter().find(|c| c.program.ends_with("/bin/pip")).unwrap();
    let galaxy = calls.iter().find(|c| c.program == "ansible-galaxy").unwrap();
    assert_eq!(
        pip.env,
        vec![("https_proxy".to_string(), "http://secure:3129".to_string())]
    );
    assert_eq!(
        galaxy.env,
        vec![("https_proxy".to_string(), "http://plain:3128".to_string())]
    );
}

#[parameterized(
    utility = { "cp -r", "utility" },
    first_pip = { "install requests", "requests" },
    second_pip = { "install pyyaml", "pyyaml" },
    galaxy = { "geerlingguy.java", "geerlingguy.java" },
)]
#[test_macro(tokio::test)]
async fn any_failure_leaves_no_marker(pattern: &str, package: &str) {
    let f = fixture(|_| {});
    // Stale marker from an earlier run must not survive either
    f.ws.write_marker("stale").unwrap();
    f.fake
        .respond(pattern, ProcessOutput::exited(1).with_stderr("simulated failure"));
    let mut log = Vec::new();

    let err = f.installer.install(&f.ws, &manifest(), &mut log).await.unwrap_err();

    match err {
        ExecutorError::Install { package: p, detail } => {
            assert_eq!(p, package);
            assert_eq!(detail, "simulated failure");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!f.ws.has_marker());
    assert!(log.contains(&"simulated failure".to_string()));
}

#[tokio::test]
async fn failure_stops_remaining_installs() {
    let f = fixture(|_| {});
    f.fake.respond("install requests", ProcessOutput::exited(1));

    let _ = f.installer.install(&f.ws, &manifest(), &mut Vec::new()).await;

    assert_eq!(f.fake.calls().len(), 2, "{:?}", f.fake.command_lines());
}

#[tokio::test]
async fn install_timeout_rolls_back() {
    let f = fixture(|_| {});
    f.fake.respond("ansible-galaxy", ProcessOutput::timed_out());

    let err = f
        .installer
        .install(&f.ws, &manifest(), &mut Vec::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("timeout after 30 seconds"), "{err}");
    assert!(!f.ws.has_marker());
}

#[tokio::test]
async fn missing_site_packages_fails_utility_install() {
    let deploy = TempDir::new().unwrap();
    let ws = uploaded(deploy.path());
    let fake = FakeProcessAdapter::new();
    let installer = Installer::new(fake.clone(), &settings(deploy.path()));

    let err = installer
        .install(&ws, &manifest(), &mut Vec::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutorError::Install { ref package, .. } if package == UTILITY_PACKAGE));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn install_stdout_lands_in_log() {
    let f = fixture(|_| {});
    f.fake.respond(
        "install requests",
        ProcessOutput::exited(0).with_stdout("Collecting requests\nSuccessfully installed requests-2.31\n"),
    );
    let mut log = Vec::new();

    f.installer.install(&f.ws, &manifest(), &mut log).await.unwrap();

    assert_eq!(log, vec!["Collecting requests", "Successfully installed requests-2.31"]);
}

use anyhow::Result;
use houer::domain::{ContainerKind, ContainerRecord, ContainerStatus, CreateOptions};
use houer::infra::ContainerConfigStore;
use houer::services::ContainerManager;
use houer::test_support::MockRunner;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::Span;

fn create_manager(mock: &Arc<MockRunner>, temp: &TempDir) -> Result<ContainerManager> {
    let configs = ContainerConfigStore::new(temp.path().join("containers"));
    let manager = ContainerManager::new(mock.clone(), configs, Span::none())?
        .with_home(Some(PathBuf::from("/home/tester")))
        .with_launcher_dir(temp.path().join("Desktop"));
    Ok(manager)
}

fn linux(name: &str) -> ContainerRecord {
    ContainerRecord {
        name: name.into(),
        status: ContainerStatus::Running,
        distro: "fedora".into(),
        kind: ContainerKind::Linux,
        image: "fedora:latest".into(),
        created: "t0".into(),
        id: Some("abc".into()),
    }
}

fn windows(name: &str) -> ContainerRecord {
    ContainerRecord {
        name: name.into(),
        status: ContainerStatus::Stopped,
        distro: "Windows".into(),
        kind: ContainerKind::Windows,
        image: "windows-11".into(),
        created: "unknown".into(),
        id: None,
    }
}

#[test]
fn test_list_parses_distrobox_json() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::new());
    mock.respond(
        "distrobox list --json",
        0,
        r#"[{"name":"dev","status":"running","distro":"fedora","image":"fedora:latest","created":"t0","id":"abc"}]"#,
    );

    let records = create_manager(&mock, &temp)?.list();

    assert_eq!(records, vec![linux("dev")]);

    Ok(())
}

#[test]
fn test_list_parses_soda_table() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::with_tools(&["distrobox", "podman", "soda"]));
    mock.respond("soda list", 0, "NAME STATUS\nwin1 running\nwin2 stopped");

    let records = create_manager(&mock, &temp)?.list();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "win1");
    assert_eq!(records[0].status, ContainerStatus::Running);
    assert_eq!(records[1].name, "win2");
    assert_eq!(records[1].status, ContainerStatus::Stopped);
    for record in &records {
        assert_eq!(record.kind, ContainerKind::Windows);
        assert_eq!(record.distro, "Windows");
        assert_eq!(record.created, "unknown");
    }

    Ok(())
}

#[test]
fn test_list_concatenates_linux_then_windows_without_dedup() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::with_tools(&["distrobox", "podman", "soda"]));
    mock.respond(
        "distrobox list --json",
        0,
        r#"[{"name":"shared","status":"running"},{"name":"alpha","status":"stopped"}]"#,
    );
    mock.respond("soda list", 0, "NAME IMAGE\nshared windows-10\nbeta windows-11");

    let records = create_manager(&mock, &temp)?.list();
    let keys: Vec<(&str, ContainerKind)> =
        records.iter().map(|r| (r.name.as_str(), r.kind)).collect();

    assert_eq!(
        keys,
        vec![
            ("shared", ContainerKind::Linux),
            ("alpha", ContainerKind::Linux),
            ("shared", ContainerKind::Windows),
            ("beta", ContainerKind::Windows),
        ]
    );

    Ok(())
}

#[test]
fn test_list_skips_soda_when_not_installed() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::new());

    let records = create_manager(&mock, &temp)?.list();

    assert!(records.is_empty());
    assert_eq!(mock.get_commands(), vec!["distrobox list --json"]);

    Ok(())
}

#[test]
fn test_create_linux_with_gpu_flag() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::new());
    let options = CreateOptions {
        nvidia_support: true,
        ..Default::default()
    };

    let created = create_manager(&mock, &temp)?.create(
        ContainerKind::Linux,
        "t1",
        "ubuntu:latest",
        &options,
    );

    assert!(created);
    assert_eq!(
        mock.get_commands(),
        vec!["distrobox create --name t1 --image ubuntu:latest --home /home/tester --nvidia"]
    );

    Ok(())
}

#[test]
fn test_create_linux_fails_on_nonzero_exit() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::new());
    let options = CreateOptions {
        nvidia_support: true,
        ..Default::default()
    };
    mock.respond(
        "distrobox create --name t1 --image ubuntu:latest --home /home/tester --nvidia",
        1,
        "",
    );

    let created = create_manager(&mock, &temp)?.create(
        ContainerKind::Linux,
        "t1",
        "ubuntu:latest",
        &options,
    );

    assert!(!created);

    Ok(())
}

#[test]
fn test_create_linux_with_packages_and_no_home() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::new());
    let options = CreateOptions {
        home_sharing: false,
        nvidia_support: false,
        additional_packages: vec!["git".into(), "htop".into()],
    };

    assert!(create_manager(&mock, &temp)?.create(
        ContainerKind::Linux,
        "t2",
        "debian:latest",
        &options
    ));
    assert_eq!(
        mock.get_commands(),
        vec![
            "distrobox create --name t2 --image debian:latest --additional-packages git --additional-packages htop"
        ]
    );

    Ok(())
}

#[test]
fn test_create_windows_requires_soda() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::new());

    let created = create_manager(&mock, &temp)?.create(
        ContainerKind::Windows,
        "w1",
        "windows-11",
        &CreateOptions::default(),
    );

    assert!(!created);
    assert!(mock.get_commands().is_empty());

    Ok(())
}

#[test]
fn test_create_windows_uses_version() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::with_tools(&["distrobox", "podman", "soda"]));

    assert!(create_manager(&mock, &temp)?.create(
        ContainerKind::Windows,
        "w1",
        "windows-11",
        &CreateOptions::default(),
    ));
    assert_eq!(
        mock.get_commands(),
        vec!["soda create --name w1 --version windows-11"]
    );

    Ok(())
}

#[test]
fn test_create_rejects_blank_name() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::new());

    assert!(!create_manager(&mock, &temp)?.create(
        ContainerKind::Linux,
        "  ",
        "ubuntu:latest",
        &CreateOptions::default(),
    ));
    assert!(mock.get_commands().is_empty());

    Ok(())
}

#[test]
fn test_start_launches_backend_enter_or_start() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::with_tools(&["distrobox", "podman", "soda"]));
    let manager = create_manager(&mock, &temp)?;

    assert!(manager.start(&linux("dev")).is_some());
    assert!(manager.start(&windows("win")).is_some());

    assert_eq!(
        mock.get_commands(),
        vec!["distrobox enter dev", "soda start win"]
    );

    Ok(())
}

#[test]
fn test_start_reports_launch_failure() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::new());
    mock.fail_spawn("distrobox enter dev");

    assert!(create_manager(&mock, &temp)?.start(&linux("dev")).is_none());

    Ok(())
}

#[test]
fn test_stop_uses_podman_for_linux_and_soda_for_windows() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::with_tools(&["distrobox", "podman", "soda"]));
    let manager = create_manager(&mock, &temp)?;

    assert!(manager.stop(&linux("dev")));
    assert!(manager.stop(&windows("win")));

    assert_eq!(mock.get_commands(), vec!["podman stop dev", "soda stop win"]);

    Ok(())
}

#[test]
fn test_stop_fails_on_nonzero_exit() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::new());
    mock.respond("podman stop dev", 125, "");

    assert!(!create_manager(&mock, &temp)?.stop(&linux("dev")));

    Ok(())
}

#[test]
fn test_list_applications_parses_descriptors() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::new());
    mock.respond(
        "distrobox enter dev -- find /usr/share/applications -name *.desktop",
        0,
        "/usr/share/applications/gimp.desktop\n\n/usr/share/applications/helper.desktop\n/usr/share/applications/broken.desktop\n",
    );
    mock.respond(
        "distrobox enter dev -- cat /usr/share/applications/gimp.desktop",
        0,
        "[Desktop Entry]\nName=GIMP\nExec=gimp %U\nIcon=gimp\nComment=Edit images\n",
    );
    mock.respond(
        "distrobox enter dev -- cat /usr/share/applications/helper.desktop",
        0,
        "[Desktop Entry]\nExec=helper\n",
    );
    mock.respond(
        "distrobox enter dev -- cat /usr/share/applications/broken.desktop",
        1,
        "",
    );

    let apps = create_manager(&mock, &temp)?.list_applications(&linux("dev"));

    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].name.as_deref(), Some("GIMP"));
    assert_eq!(apps[0].exec.as_deref(), Some("gimp %U"));
    assert_eq!(apps[0].icon.as_deref(), Some("gimp"));
    assert_eq!(apps[0].comment.as_deref(), Some("Edit images"));
    assert_eq!(apps[0].desktop_file, "/usr/share/applications/gimp.desktop");

    Ok(())
}

#[test]
fn test_list_applications_is_empty_for_windows() -> Result<()> {
    let temp = TempDir::new()?;
    let mock = Arc::new(MockRunner::with_tools(&["distrobox", "podman", "soda"]));

    let apps = create_manager(&mock, &temp)?.list_applications(&windows("win"));

    assert!(apps.is_empty());
    assert!(mock.get_commands().is_empty());

    Ok(())
}

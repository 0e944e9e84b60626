use crate::cli::target::{KindArg, Target};
use crate::domain::{ApplicationRecord, ContainerKind, ContainerRecord};
use crate::infra::{Settings, SystemRunner};
use crate::services::{ContainerManager, Refresher};
use anyhow::{Result, bail};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info_span, warn};

#[derive(Subcommand)]
pub enum ContainerAction {
    /// List Linux and Windows containers
    List {
        /// Only show containers of one backend
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new container
    Create {
        #[arg(value_enum)]
        kind: KindArg,
        name: String,
        /// Image (linux) or Windows version (windows); defaults to the first supported entry
        #[arg(long)]
        image: Option<String>,
        /// Do not share the home directory
        #[arg(long)]
        no_home: bool,
        /// Enable NVIDIA GPU passthrough
        #[arg(long)]
        nvidia: bool,
        /// Extra package to install, repeatable
        #[arg(long = "package", value_name = "PACKAGE")]
        packages: Vec<String>,
    },
    /// Launch a container without waiting for it
    Start(Target),
    /// Stop a container
    Stop(Target),
    /// Delete a container and its stored config
    Delete(Target),
    /// List desktop applications installed inside a container
    Apps {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        json: bool,
    },
    /// Create a host launcher for an application inside a container
    Shortcut {
        #[command(flatten)]
        target: Target,
        /// Application name or descriptor path
        app: String,
        /// Launcher display name (default: "<app> (<container>)")
        #[arg(long)]
        display_name: Option<String>,
        /// Launcher directory (default: desktop directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Keep listing containers at the configured refresh interval
    Watch {
        /// Refresh interval in milliseconds, overrides settings
        #[arg(long)]
        interval: Option<u64>,
        /// Stop after this many snapshots
        #[arg(long)]
        count: Option<usize>,
    },
}

struct Session {
    settings: Settings,
    manager: ContainerManager,
}

impl Session {
    fn open(config_dir: &Path) -> Result<Self> {
        let settings = Settings::load(config_dir)?;
        let runner = Arc::new(SystemRunner::new().with_timeout(settings.command_timeout()));
        let manager = ContainerManager::new(
            runner,
            settings.container_configs(),
            info_span!("containers"),
        )?;

        Ok(Self { settings, manager })
    }

    fn find(&self, target: &Target) -> Result<ContainerRecord> {
        let records = self.manager.list();
        target.resolve(&records).cloned()
    }

    fn list(&self, kind: Option<KindArg>, json: bool) -> Result<()> {
        let kind = kind.map(ContainerKind::from);
        let records: Vec<ContainerRecord> = self
            .manager
            .list()
            .into_iter()
            .filter(|record| kind.is_none_or(|k| record.kind == k))
            .collect();

        if json {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        print_table(&records);
        Ok(())
    }

    fn create(
        &self,
        kind: ContainerKind,
        name: &str,
        image: Option<String>,
        no_home: bool,
        nvidia: bool,
        packages: Vec<String>,
    ) -> Result<()> {
        let image = match image {
            Some(image) => image,
            None => match self.settings.supported_distros(kind).into_iter().next() {
                Some(image) => image,
                None => bail!("no --image given and no supported {kind} images configured"),
            },
        };

        let mut options = self.settings.distrobox_options();
        if no_home {
            options.home_sharing = false;
        }
        if nvidia {
            options.nvidia_support = true;
        }
        options.additional_packages.extend(packages);

        println!("📦 Creating {kind} container {name} from {image}...");
        if !self.manager.create(kind, name, &image, &options) {
            bail!("could not create {kind} container '{name}'");
        }

        println!("✅ Container {name} created");
        Ok(())
    }

    fn start(&self, target: &Target) -> Result<()> {
        let record = self.find(target)?;

        match self.manager.start(&record) {
            Some(launched) => {
                println!("🚀 Starting {} (pid {})", record.name, launched.pid);
                Ok(())
            }
            None => bail!("could not start '{}'", record.name),
        }
    }

    fn stop(&self, target: &Target) -> Result<()> {
        let record = self.find(target)?;

        if !record.is_running() {
            println!("⚠️  {} is not reported as running, stopping anyway", record.name);
        }

        if !self.manager.stop(&record) {
            bail!("could not stop '{}'", record.name);
        }

        println!("✅ {} stopped", record.name);
        Ok(())
    }

    fn delete(&self, target: &Target) -> Result<()> {
        let record = self.find(target)?;

        if !self.manager.delete(&record) {
            bail!("could not delete '{}'", record.name);
        }

        println!("✅ {} deleted", record.name);
        Ok(())
    }

    fn apps(&self, target: &Target, json: bool) -> Result<()> {
        let record = self.find(target)?;
        let apps = self.manager.list_applications(&record);

        if json {
            println!("{}", serde_json::to_string_pretty(&apps)?);
            return Ok(());
        }

        if apps.is_empty() {
            println!("⚠️  No applications found in {}", record.name);
            return Ok(());
        }

        for app in &apps {
            println!(
                "- {:<30} | {:<40} | {}",
                app.display_name(),
                app.exec.as_deref().unwrap_or("-"),
                app.desktop_file
            );
        }

        Ok(())
    }

    fn shortcut(
        self,
        target: &Target,
        app: &str,
        display_name: Option<&str>,
        dir: Option<PathBuf>,
    ) -> Result<()> {
        let record = self.find(target)?;
        let apps = self.manager.list_applications(&record);
        let Some(app) = find_app(&apps, app) else {
            bail!("no application '{app}' in {}", record.name);
        };

        let manager = match dir {
            Some(dir) => self.manager.with_launcher_dir(dir),
            None => self.manager,
        };

        match manager.create_application_shortcut(&record, app, display_name) {
            Some(path) => {
                println!("✅ Launcher written to {:?}", path);
                Ok(())
            }
            None => bail!("could not create launcher for '{}'", app.display_name()),
        }
    }

    fn watch(self, interval: Option<u64>, count: Option<usize>) -> Result<()> {
        let interval = match interval {
            Some(ms) => Duration::from_millis(ms.max(1)),
            None if self.settings.auto_refresh() => self.settings.refresh_interval(),
            None => {
                warn!("auto_refresh is disabled in settings, showing a single snapshot");
                print_table(&self.manager.list());
                return Ok(());
            }
        };

        let (refresher, snapshots) = Refresher::spawn(Arc::new(self.manager), interval);

        for (index, records) in snapshots.iter().enumerate() {
            println!("📦 Snapshot {} ({} containers)", index + 1, records.len());
            print_table(&records);

            if count.is_some_and(|limit| index + 1 >= limit) {
                break;
            }
        }

        refresher.stop();
        Ok(())
    }
}

fn find_app<'a>(apps: &'a [ApplicationRecord], query: &str) -> Option<&'a ApplicationRecord> {
    apps.iter()
        .find(|app| app.name.as_deref() == Some(query))
        .or_else(|| apps.iter().find(|app| app.desktop_file == query))
        .or_else(|| {
            apps.iter()
                .find(|app| app.display_name().eq_ignore_ascii_case(query))
        })
}

fn print_table(records: &[ContainerRecord]) {
    if records.is_empty() {
        println!("⚠️  No containers found");
        return;
    }

    println!(
        "{:<20} | {:<8} | {:<7} | {:<12} | {:<28} | {}",
        "NAME", "STATUS", "KIND", "DISTRO", "IMAGE", "CREATED"
    );
    for record in records {
        println!(
            "{:<20} | {:<8} | {:<7} | {:<12} | {:<28} | {}",
            record.name,
            record.status.to_string(),
            record.kind.to_string(),
            record.distro,
            record.image,
            record.created
        );
    }
}

pub fn run(action: ContainerAction, config_dir: &Path) -> Result<()> {
    let session = Session::open(config_dir)?;

    match action {
        ContainerAction::List { kind, json } => session.list(kind, json),
        ContainerAction::Create {
            kind,
            name,
            image,
            no_home,
            nvidia,
            packages,
        } => session.create(kind.into(), &name, image, no_home, nvidia, packages),
        ContainerAction::Start(target) => session.start(&target),
        ContainerAction::Stop(target) => session.stop(&target),
        ContainerAction::Delete(target) => session.delete(&target),
        ContainerAction::Apps { target, json } => session.apps(&target, json),
        ContainerAction::Shortcut {
            target,
            app,
            display_name,
            dir,
        } => session.shortcut(&target, &app, display_name.as_deref(), dir),
        ContainerAction::Watch { interval, count } => session.watch(interval, count),
    }
}

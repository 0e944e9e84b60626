use crate::domain::{ContainerKind, ContainerRecord};
use anyhow::{Result, bail};
use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Linux,
    Windows,
}

impl From<KindArg> for ContainerKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Linux => ContainerKind::Linux,
            KindArg::Windows => ContainerKind::Windows,
        }
    }
}

/// Selects one container by name, optionally narrowed by kind
#[derive(Debug, Clone, Args)]
pub struct Target {
    /// Container name
    pub name: String,
    /// Backend owning the container, needed when both have the same name
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,
}

impl Target {
    pub fn resolve<'a>(&self, records: &'a [ContainerRecord]) -> Result<&'a ContainerRecord> {
        resolve(records, &self.name, self.kind.map(ContainerKind::from))
    }
}

/// Finds the record addressed by `name` and `kind`.
///
/// Linux and Windows containers may share a name; without a kind such a name
/// is rejected instead of guessing.
pub fn resolve<'a>(
    records: &'a [ContainerRecord],
    name: &str,
    kind: Option<ContainerKind>,
) -> Result<&'a ContainerRecord> {
    let matches: Vec<&ContainerRecord> = records
        .iter()
        .filter(|record| record.name == name && kind.is_none_or(|k| record.kind == k))
        .collect();

    match matches.as_slice() {
        [] => match kind {
            Some(kind) => bail!("no {kind} container named '{name}'"),
            None => bail!("no container named '{name}'"),
        },
        [record] => Ok(*record),
        _ => bail!(
            "'{name}' matches {} containers; pass --kind linux or --kind windows",
            matches.len()
        ),
    }
}

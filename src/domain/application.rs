use serde::Serialize;

/// An application found inside a container through its desktop descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationRecord {
    /// Path of the descriptor inside the container
    pub desktop_file: String,
    pub name: Option<String>,
    pub exec: Option<String>,
    pub icon: Option<String>,
    pub comment: Option<String>,
}

impl ApplicationRecord {
    /// Parses a `.desktop` file body.
    ///
    /// Only the exact keys `Name`, `Exec`, `Icon` and `Comment` are read and the
    /// first occurrence of each wins, so `[Desktop Action]` groups further down
    /// the file do not rename the entry. Returns `None` when no `Name` is found.
    pub fn parse(desktop_file: &str, contents: &str) -> Option<Self> {
        let mut record = Self {
            desktop_file: desktop_file.to_string(),
            ..Default::default()
        };

        for line in contents.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };

            let slot = match key {
                "Name" => &mut record.name,
                "Exec" => &mut record.exec,
                "Icon" => &mut record.icon,
                "Comment" => &mut record.comment,
                _ => continue,
            };

            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }

        record.name.is_some().then_some(record)
    }

    /// Name used for display; parsed records always carry one.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("App")
    }
}

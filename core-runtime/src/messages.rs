//! User-facing status texts.
//!
//! Every string the controllers put into [`ViewState`](crate::state::ViewState)
//! comes from here so hosts can switch language through configuration.

use serde::{Deserialize, Serialize};

/// Supported UI languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "pt-BR")]
    PortugueseBrazil,
}

impl Locale {
    /// BCP 47 language tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::PortugueseBrazil => "pt-BR",
        }
    }
}

/// Message catalog for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn importing(&self) -> String {
        match self.locale {
            Locale::English => "Importing files...".to_string(),
            Locale::PortugueseBrazil => "Importando arquivos...".to_string(),
        }
    }

    pub fn import_succeeded(&self, imported: usize) -> String {
        match self.locale {
            Locale::English => format!("Imported {} files successfully", imported),
            Locale::PortugueseBrazil => format!("Importados {} arquivos com sucesso!", imported),
        }
    }

    pub fn import_partial(&self, imported: usize, skipped: usize) -> String {
        match self.locale {
            Locale::English => format!("Imported {} files. {} files skipped.", imported, skipped),
            Locale::PortugueseBrazil => format!(
                "Importados {} arquivos. {} arquivos ignorados.",
                imported, skipped
            ),
        }
    }

    pub fn import_failed(&self, description: &str) -> String {
        match self.locale {
            Locale::English => format!("Import error: {}", description),
            Locale::PortugueseBrazil => format!("Erro na importação: {}", description),
        }
    }

    pub fn export_failed(&self, description: &str) -> String {
        match self.locale {
            Locale::English => format!("Export error: {}", description),
            Locale::PortugueseBrazil => format!("Erro ao exportar: {}", description),
        }
    }

    pub fn folders_failed(&self, description: &str) -> String {
        match self.locale {
            Locale::English => format!("Error loading folders: {}", description),
            Locale::PortugueseBrazil => format!("Erro ao carregar pastas: {}", description),
        }
    }
}

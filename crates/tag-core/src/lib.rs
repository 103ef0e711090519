pub mod autofit;
pub mod badges;
pub mod binding;
pub mod derive;
pub mod error;
pub mod fields;
pub mod id;
pub mod import;
pub mod model;
pub mod persist;
pub mod presets;
pub mod print;
pub mod records;
pub mod snapshot;
pub mod store;

pub use autofit::{AutoFitLimits, FitCache, FitRequest, HeuristicMeasurer, TextMeasurer, fit};
pub use badges::{Badge, BadgeLibrary};
pub use binding::{apply_record, resolve_content, summarize_notes, update_content_for_field};
pub use derive::{DerivationRule, Recalculator, SavingsRibbon};
pub use error::{ImportError, LayerError, PersistError, VaultError};
pub use fields::{BindingMap, ColumnMapping, SystemField};
pub use id::LayerId;
pub use import::{CsvImporter, TabularImporter};
pub use model::*;
pub use persist::{KeyValueStore, MemoryStore, StorageKeys};
pub use presets::Preset;
pub use print::{Orientation, PrintQueue, SheetLayout, SheetPage, layout_sheet};
pub use records::{Record, RecordSet};
pub use snapshot::{Design, LiveData, TemplateRecord, TemplateVault};
pub use store::LayerSet;

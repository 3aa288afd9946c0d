pub mod icons;
pub mod placeholder;
pub mod terminal_ui;
pub mod toast;

pub use icons::get_icon;
pub use placeholder::{Placeholders, SkeletonKind};
pub use terminal_ui::TerminalUi;
pub use toast::ToastNotifier;

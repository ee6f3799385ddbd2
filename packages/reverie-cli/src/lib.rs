use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

/// Help styling shared by every Reverie binary.
pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Magenta.on_default() | Effects::BOLD)
		.usage(AnsiColor::Magenta.on_default() | Effects::BOLD)
		.literal(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Cyan.on_default())
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}

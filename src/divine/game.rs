use clap::ValueEnum;
use derive_more::Display;

/// Games whose packages the external tool knows how to list.
///
/// The lowercased variant name is both the CLI value and the identifier
/// passed to the tool's `--game` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Display)]
#[value(rename_all = "lower")]
#[display(rename_all = "lowercase")]
pub enum Game {
    #[default]
    Bg3,
    Dos2de,
    Dos2,
    Dosee,
    Dos,
}

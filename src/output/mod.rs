mod styling;
mod tables;

pub use styling::{bright_green, cyan, dim, magenta_bold};
pub use tables::{overview_table, repositories_table, runs_table};

/// Prints the runboard banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("▶ runboard"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitHub Actions run dashboard")
    );
}

/// Prints a one-line confirmation to stderr.
pub fn print_done(message: impl std::fmt::Display) {
    eprintln!("{} {}", bright_green("✔"), message);
}

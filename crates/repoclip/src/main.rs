use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = repoclip::cli::Cli::parse();
    repoclip::init(cli.log_level());
    repoclip::cli::run(cli)
}

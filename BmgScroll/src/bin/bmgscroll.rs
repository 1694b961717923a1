fn main() -> anyhow::Result<()> {
    bmgscroll::cli::run_cli()
}

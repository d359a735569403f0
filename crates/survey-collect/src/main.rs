fn main() -> anyhow::Result<()> {
    survey_collect::cli::main()
}

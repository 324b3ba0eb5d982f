fn main() {
    #[cfg(feature = "cli")]
    iavldump::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("iavldump: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}

use rulox::cli;

fn main() {
    env_logger::init();

    let code = match cli::parse().and_then(|cli| cli.run()) {
        Ok(code) => code,
        Err(why) => {
            eprintln!("{}", why);
            1
        }
    };
    std::process::exit(code);
}

fn main() {
    let env = env_logger::Env::new()
        .filter("REGRUN_LOG")
        .write_style("REGRUN_LOG_STYLE");
    env_logger::init_from_env(env);

    regrun::cli::run();
}

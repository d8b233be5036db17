use rt_sim::config::ServerConfig;

fn main() {
    let config = serdeconv::to_toml_string(&ServerConfig::default()).expect("failed to generate config file");
    println!("{}", config);
}

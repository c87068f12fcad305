fn main() {
    if let Err(err) = dining_battle_lib::run() {
        eprintln!("dining-battle: {err:#}");
        std::process::exit(1);
    }
}

fn main() {
    // ESP-IDF environment is only needed for Xtensa firmware builds; host builds skip it
    if let Ok(target) = std::env::var("TARGET") {
        if target.contains("xtensa") {
            embuild::espidf::sysenv::output();
        }
    }
}

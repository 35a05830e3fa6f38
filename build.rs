fn main() {
    // ESP-IDF link arguments are only needed for device builds.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}

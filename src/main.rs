fn main() -> anyhow::Result<()> {
    vocal_tales_lib::run()
}

fn main() -> anyhow::Result<()> {
    calmora::run()
}

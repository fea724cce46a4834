fn main() -> anyhow::Result<()> {
    box_grid::flow::run()
}

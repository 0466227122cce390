#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use sociograph::engine::DEFAULT_CANVAS;
    use sociograph::{Sociogram, SociogramEngine};
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_parse_and_render() {
        let definition = "sociogram\nA[Alice]\nB[Bob]\nA ->|1| B\nB ->|2| A\n";

        let graph = Sociogram::parse(definition).expect("Failed to parse sociogram");
        let engine = SociogramEngine::new(graph, DEFAULT_CANVAS);
        let svg = engine.render_svg().expect("Failed to render SVG");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("viewBox"));
    }

    #[wasm_bindgen_test]
    fn test_minimal_sociogram() {
        let graph = Sociogram::parse("sociogram\nA").expect("Failed to parse minimal sociogram");
        let engine = SociogramEngine::new(graph, DEFAULT_CANVAS);
        let svg = engine.render_svg().expect("Failed to render minimal SVG");

        assert!(svg.contains("<svg"));
        assert!(svg.contains(">A</text>"));
    }
}

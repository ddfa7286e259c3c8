use code_city_layout::layout_dump::LayoutDump;
use code_city_layout::{Graph, LayoutConfig, LayoutOptions, compute_layout};
use wasm_bindgen::prelude::*;

fn layout_to_json(graph_json: &str, options: LayoutOptions) -> Result<String, String> {
    let graph = Graph::from_json(graph_json).map_err(|error| error.to_string())?;
    let mut config = LayoutConfig::default();
    options.apply(&mut config);
    let result = compute_layout(&graph, &config);
    let dump = LayoutDump::from_result(&result, &graph, config.cluster.threshold);
    serde_json::to_string(&dump).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn layout_city(graph_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<LayoutOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        LayoutOptions::default()
    };

    layout_to_json(graph_json, options).map_err(|error| JsValue::from_str(&error))
}

#[cfg(test)]
mod tests {
    use code_city_layout::LayoutOptions;

    use crate::layout_to_json;

    #[test]
    fn lays_out_small_city() {
        let graph = r#"{
            "nodes": [
                {"id": "src/index.ts", "type": "file", "path": "src/index.ts"},
                {"id": "src/db/pool.ts", "type": "file", "path": "src/db/pool.ts"},
                {"id": "pg", "type": "package", "isExternal": true,
                 "metadata": {"infrastructureType": "database"}}
            ],
            "edges": [{"source": "src/db/pool.ts", "target": "pg", "type": "depends_on"}]
        }"#;
        let options: LayoutOptions = serde_json::from_str(r#"{"density": 2.0, "seed": 3}"#)
            .expect("options should parse");

        let json = layout_to_json(graph, options).expect("layout should succeed");
        let value: serde_json::Value = serde_json::from_str(&json).expect("dump is JSON");

        assert_eq!(value["nodeCount"], 3);
        assert_eq!(value["zones"][0]["zoneType"], "database");
    }

    #[test]
    fn rejects_malformed_graph() {
        assert!(layout_to_json("{not json", LayoutOptions::default()).is_err());
    }
}

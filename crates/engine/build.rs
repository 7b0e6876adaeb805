fn main() {
    // Tell cargo to rerun this build script if shaders change
    println!("cargo:rerun-if-changed=src/layers/renderer/shader.wgsl");

    // Validate all shader files at compile time
    validate_shader("src/layers/renderer/shader.wgsl");
}

fn validate_shader(path: &str) {
    let shader_source = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read shader file {}: {}", path, e));

    let module = match naga::front::wgsl::parse_str(&shader_source) {
        Ok(module) => module,
        Err(e) => {
            panic!("Shader parsing failed for {}:\n{:?}", path, e);
        }
    };

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );

    if let Err(e) = validator.validate(&module) {
        panic!("Shader validation failed for {}:\n{:?}", path, e);
    }
}

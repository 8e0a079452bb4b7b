fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Fall back to the bundled protoc when none is configured
    if std::env::var_os("PROTOC").is_none() {
        let protoc = protoc_bin_vendored::protoc_bin_path().map_err(|e| format!("{e:?}"))?;
        std::env::set_var("PROTOC", protoc);
    }
    tonic_build::compile_protos("../../proto/demand.proto")?;
    println!("cargo:rerun-if-changed=../../proto/demand.proto");
    Ok(())
}

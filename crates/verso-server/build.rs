fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile the config controller gRPC service proto
    tonic_prost_build::configure().compile_protos(&["proto/verso.proto"], &["proto"])?;
    Ok(())
}

use candle_core::Device;
use tracing::info;

/// Pick the accelerator compiled in, falling back to the CPU.
pub fn select_device(ordinal: usize) -> Device {
    #[cfg(feature = "cuda")]
    {
        if let Ok(dev) = Device::new_cuda(ordinal) { info!(ordinal, "device: CUDA"); return dev; }
    }
    #[cfg(feature = "metal")]
    {
        if let Ok(dev) = Device::new_metal(ordinal) { info!(ordinal, "device: Metal"); return dev; }
    }
    let _ = ordinal;
    info!("device: CPU");
    Device::Cpu
}

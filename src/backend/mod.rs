// Backend module - Vulkan bootstrap layer
//
// Thin wrapper around ash: device, surface, swapchain.

pub mod device;
pub mod surface;
pub mod swapchain;

pub use device::VulkanDevice;
pub use surface::Surface;
pub use swapchain::Swapchain;

// Presentation surface - connects the Vulkan instance to the native window
//
// winit reports either an Xlib or an Xcb handle depending on which X11
// path it took; both map to their respective KHR surface extension.

use anyhow::{Context, Result};
use ash::vk;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use super::VulkanDevice;

pub struct Surface {
    pub handle: vk::SurfaceKHR,
    pub loader: ash::extensions::khr::Surface,
}

impl Surface {
    /// Create a surface from the window's raw handles and verify the
    /// device's graphics queue family can present to it.
    pub fn new(
        device: &VulkanDevice,
        display_handle: RawDisplayHandle,
        window_handle: RawWindowHandle,
    ) -> Result<Self> {
        let loader = ash::extensions::khr::Surface::new(&device.entry, &device.instance);

        let handle = match (display_handle, window_handle) {
            (RawDisplayHandle::Xlib(display), RawWindowHandle::Xlib(window)) => {
                let dpy = display
                    .display
                    .context("Xlib display handle has no display pointer")?;
                let create_info = vk::XlibSurfaceCreateInfoKHR::builder()
                    .dpy(dpy.as_ptr() as *mut _)
                    .window(window.window);
                let xlib_loader =
                    ash::extensions::khr::XlibSurface::new(&device.entry, &device.instance);
                unsafe { xlib_loader.create_xlib_surface(&create_info, None) }
                    .context("Failed to create Xlib surface")?
            }
            (RawDisplayHandle::Xcb(display), RawWindowHandle::Xcb(window)) => {
                let connection = display
                    .connection
                    .context("XCB display handle has no connection pointer")?;
                let create_info = vk::XcbSurfaceCreateInfoKHR::builder()
                    .connection(connection.as_ptr() as *mut _)
                    .window(window.window.get());
                let xcb_loader =
                    ash::extensions::khr::XcbSurface::new(&device.entry, &device.instance);
                unsafe { xcb_loader.create_xcb_surface(&create_info, None) }
                    .context("Failed to create XCB surface")?
            }
            _ => anyhow::bail!(
                "Unsupported window handle type (not Xlib or XCB); run under X11"
            ),
        };

        // Verify the GPU supports presenting to this surface
        let supported = unsafe {
            loader.get_physical_device_surface_support(
                device.physical_device,
                device.graphics_queue_family,
                handle,
            )
        };

        match supported {
            Ok(true) => Ok(Self { handle, loader }),
            Ok(false) => {
                unsafe { loader.destroy_surface(handle, None) };
                anyhow::bail!("GPU doesn't support presenting to this surface")
            }
            Err(e) => {
                unsafe { loader.destroy_surface(handle, None) };
                Err(e).context("Failed to query surface support")
            }
        }
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_surface(self.handle, None);
        }
    }
}

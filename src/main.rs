// =============================================================================
// VKWINDOW - X11 window + Vulkan presentation bootstrap
// =============================================================================
//
// Opens a native window, then brings up the Vulkan chain in order:
//   instance -> physical/logical device -> surface -> swapchain
// and runs the event loop until the window is closed. Nothing is rendered;
// on the first initialization failure everything created so far is torn
// down (reverse order, via Drop) and the process exits with an error.

mod backend;
mod cli;
mod config;

use anyhow::{Context, Result};
use backend::{Surface, Swapchain, VulkanDevice};
use cli::{Command, Options};
use config::Config;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes},
};

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "vkwindow".to_string());

    let options = match cli::parse(args) {
        Ok(Command::Help) => {
            print!("{}", cli::usage(&program));
            return Ok(());
        }
        Ok(Command::Version) => {
            println!("{}", cli::version());
            return Ok(());
        }
        Ok(Command::Run(options)) => options,
        Err(e) => {
            eprintln!("{program}: {e}");
            eprint!("{}", cli::usage(&program));
            std::process::exit(1);
        }
    };

    init_logging(&options);

    let config = Config::load();
    log::info!("Starting {}", cli::version());
    log::info!(
        "Window: {}x{} \"{}\"",
        config.window.width,
        config.window.height,
        config.window.title
    );

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    // An error during resumed() only exits the event loop; surface it here.
    if let Some(e) = app.init_error.take() {
        return Err(e);
    }

    log::info!("Window closed, exiting");
    Ok(())
}

/// Initialize logging; --verbose raises the default level to debug.
fn init_logging(options: &Options) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if options.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = Builder::from_default_env();
    builder.filter_level(level);
    builder.init();
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// All window and Vulkan state. Resources are torn down in reverse order
/// of creation: swapchain, surface, device, then the window itself.
struct App {
    config: Config,

    window: Option<Arc<Window>>,
    /// Last known client-area size, updated on resize events.
    size: PhysicalSize<u32>,

    device: Option<Arc<VulkanDevice>>,
    surface: Option<Surface>,
    swapchain: Option<Swapchain>,

    /// First error hit during initialization, reported from main().
    init_error: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config) -> Self {
        let size = PhysicalSize::new(config.window.width, config.window.height);
        Self {
            config,
            window: None,
            size,
            device: None,
            surface: None,
            swapchain: None,
            init_error: None,
        }
    }

    /// Bring up the Vulkan chain for the freshly created window.
    fn init_vulkan(&mut self, window: &Window) -> Result<()> {
        log::info!("Initializing Vulkan...");

        // Step 1: Instance + device
        let enable_validation = cfg!(debug_assertions) && self.config.debug.validation_layers;
        let device = VulkanDevice::new(&self.config.window.title, enable_validation)?;

        // Step 2: Surface from the window's raw handles
        use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
        let window_handle = window
            .window_handle()
            .context("Failed to get window handle")?
            .as_raw();
        let display_handle = window
            .display_handle()
            .context("Failed to get display handle")?
            .as_raw();

        let surface = Surface::new(&device, display_handle, window_handle)?;
        log::debug!(
            "Graphics queue family {} (queue {:?})",
            device.graphics_queue_family,
            device.graphics_queue
        );

        // Step 3: Swapchain matching the surface capabilities
        let size = window.inner_size();
        let swapchain = Swapchain::new(
            device.clone(),
            &surface,
            self.config.preferred_present_mode(),
            size.width,
            size.height,
        )?;

        log::info!(
            "Swapchain ready: {} images, {:?}, {}x{}",
            swapchain.images.len(),
            swapchain.format,
            swapchain.extent.width,
            swapchain.extent.height
        );

        self.size = size;
        self.device = Some(device);
        self.surface = Some(surface);
        self.swapchain = Some(swapchain);

        log::info!("Vulkan initialized successfully");
        Ok(())
    }
}

// =============================================================================
// EVENT HANDLING
// =============================================================================

impl ApplicationHandler for App {
    /// Called when the application is ready to create windows.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = WindowAttributes::default()
            .with_title(&self.config.window.title)
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {:?}", e);
                self.init_error = Some(anyhow::Error::new(e).context("Failed to create window"));
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.init_vulkan(&window) {
            log::error!("Failed to initialize Vulkan: {:?}", e);
            self.init_error = Some(e);
            event_loop.exit();
            return;
        }

        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down...");
                if let Some(ref device) = self.device {
                    let _ = device.wait_idle();
                }
                event_loop.exit();
            }

            // Record the new size only; the swapchain is not recreated
            // because nothing presents to it.
            WindowEvent::Resized(size) => {
                if size != self.size {
                    log::debug!("Window resized to {}x{}", size.width, size.height);
                    self.size = size;
                }
            }

            _ => {}
        }
    }
}

// =============================================================================
// CLEANUP
// =============================================================================

impl Drop for App {
    fn drop(&mut self) {
        log::info!("Cleaning up Vulkan resources...");

        if let Some(ref device) = self.device {
            let _ = device.wait_idle();
        }

        // Destroy in reverse order of creation; the device itself is
        // released when its last Arc goes away.
        self.swapchain = None;
        self.surface = None;
        self.device = None;

        log::info!("Cleanup complete");
    }
}

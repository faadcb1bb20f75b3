cfg_if! {
    if #[cfg(target_os = "macos")] {
        mod darwin;
        pub(crate) use darwin::{
            activate_socket, files, is_managed_by_launchd, listeners, packet_listeners,
        };
    } else {
        mod unsupported;
        pub(crate) use unsupported::{
            activate_socket, files, is_managed_by_launchd, listeners, packet_listeners,
        };
    }
}

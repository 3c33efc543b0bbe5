mod debounce;
mod google;

mod file_io;
mod path_name;

pub use file_io::{
    copy_file, file_exists, file_size, is_directory, is_file, read_exact_from, read_file,
    temp_dir, write_all_to, write_file,
};
pub use path_name::{base_name_of, directory_of, extension_of, leaf_name_of};

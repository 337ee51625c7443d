use fsu_kit::{
    DirCursor, FileMap, base_name_of, copy_file, extension_of, leaf_name_of, read_file, temp_dir,
    write_file,
};

fn main() -> anyhow::Result<()> {
    let root = temp_dir().join("fsu_kit_hello");
    println!("Scratch dir: {}", root.display());
    std::fs::create_dir_all(&root)?;

    // writes two files; `write_file` creates or truncates
    write_file(root.join("first.txt"), b"Hello")?;
    write_file(root.join("second.txt"), b"World")?;

    // copies the first file, then reads the copy back whole
    copy_file(root.join("first.txt"), root.join("first.bak"))?;
    assert_eq!(read_file(root.join("first.bak"))?, b"Hello");

    // lists the directory; `.` and `..` never show up
    let mut cursor = DirCursor::open(&root)?;
    // names stay raw `OsString`s, so the path helpers never lose bytes
    while let Some(name) = cursor.next_entry() {
        println!(
            "{:?} base={:?} ext={:?}",
            leaf_name_of(&name),
            base_name_of(&name),
            extension_of(&name)
        );
    }
    cursor.close()?;

    // maps both files without copying them into buffers
    let first = FileMap::map(root.join("first.txt"))?;
    let second = FileMap::map(root.join("second.txt"))?;
    println!(
        "{}, {}!",
        String::from_utf8_lossy(&first),
        String::from_utf8_lossy(&second)
    );
    first.unmap()?;
    // dropping releases the mapping too
    drop(second);

    std::fs::remove_dir_all(&root)?;
    Ok(())
}

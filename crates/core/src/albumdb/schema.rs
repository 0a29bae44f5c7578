use rusqlite::Connection;

use crate::error::Result;

/// Create the digiKam table layout on a scratch database.
///
/// Real libraries are created and migrated by digiKam itself; this DDL exists
/// only so tests and throwaway databases can be bootstrapped without a running
/// digiKam. Table and column names must stay byte-identical to digiKam's.
pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS AlbumRoots (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            label        TEXT,
            status       INTEGER NOT NULL,
            type         INTEGER NOT NULL,
            identifier   TEXT,
            specificPath TEXT,
            UNIQUE(identifier, specificPath)
        );

        CREATE TABLE IF NOT EXISTS Albums (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            albumRoot    INTEGER NOT NULL,
            relativePath TEXT NOT NULL,
            date         DATE,
            caption      TEXT,
            collection   TEXT,
            icon         INTEGER,
            UNIQUE(albumRoot, relativePath)
        );

        CREATE TABLE IF NOT EXISTS Images (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            album            INTEGER,
            name             TEXT NOT NULL,
            status           INTEGER NOT NULL,
            category         INTEGER NOT NULL,
            modificationDate DATETIME,
            fileSize         INTEGER,
            uniqueHash       TEXT,
            UNIQUE(album, name)
        );

        CREATE TABLE IF NOT EXISTS ImageInformation (
            imageid          INTEGER PRIMARY KEY,
            rating           INTEGER,
            creationDate     DATETIME,
            digitizationDate DATETIME,
            orientation      INTEGER,
            width            INTEGER,
            height           INTEGER,
            format           TEXT
        );

        CREATE TABLE IF NOT EXISTS ImageMetadata (
            imageid                      INTEGER PRIMARY KEY,
            make                         TEXT,
            model                        TEXT,
            lens                         TEXT,
            aperture                     REAL,
            focalLength                  REAL,
            focalLength35                REAL,
            exposureTime                 REAL,
            exposureProgram              INTEGER,
            exposureMode                 INTEGER,
            sensitivity                  INTEGER,
            flash                        INTEGER,
            whiteBalance                 INTEGER,
            whiteBalanceColorTemperature INTEGER,
            meteringMode                 INTEGER,
            subjectDistance              REAL,
            subjectDistanceCategory      INTEGER
        );

        CREATE TABLE IF NOT EXISTS VideoMetadata (
            imageid          INTEGER PRIMARY KEY,
            aspectRatio      TEXT,
            audioBitRate     TEXT,
            audioChannelType TEXT,
            audioCompressor  TEXT,
            duration         TEXT,
            frameRate        TEXT,
            exposureProgram  INTEGER,
            videoCodec       TEXT
        );

        CREATE TABLE IF NOT EXISTS Tags (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            pid  INTEGER,
            name TEXT NOT NULL,
            UNIQUE(pid, name)
        );

        CREATE TABLE IF NOT EXISTS ImageTags (
            imageid INTEGER NOT NULL,
            tagid   INTEGER NOT NULL,
            UNIQUE(imageid, tagid)
        );
        ",
    )?;
    Ok(())
}
